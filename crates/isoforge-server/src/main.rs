//! TCP listener binary.
//!
//! # Usage
//!
//! ```bash
//! # Plain text console: log whatever peers send
//! isoforge-server --port 8583
//!
//! # Treat inbound text as hex-encoded ISO 8583 and decode it
//! isoforge-server --port 8583 --decode
//! ```

use clap::Parser;
use isoforge_codec::{Align, FieldAttr, FieldSpec, FieldTable, LengthMode, decode_message};
use isoforge_server::{ListenState, TcpMultiplexer};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// ISO 8583 workbench TCP listener
#[derive(Parser, Debug)]
#[command(name = "isoforge-server")]
#[command(about = "Raw TCP listener with optional ISO 8583 decoding")]
#[command(version)]
struct Args {
    /// Port to listen on (binds all interfaces)
    #[arg(short, long, default_value = "8583")]
    port: u16,

    /// Decode inbound text as hex-encoded ISO 8583 messages
    #[arg(long)]
    decode: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Field specs for the common subset of the primary bitmap range.
///
/// Stand-in table for decoding without a caller-supplied configuration:
/// PAN, processing code, amount, STAN, and terminal ID.
fn sample_field_table() -> Result<FieldTable, isoforge_codec::CodecError> {
    let mut table = FieldTable::new();

    // 2: PAN, LLVAR BCD up to 19 digits
    table.insert(2, FieldSpec::new(FieldAttr::Bcd, LengthMode::Variable, Align::Left, 19, '0')?);
    // 3: processing code, 6 BCD digits
    table.insert(3, FieldSpec::new(FieldAttr::Bcd, LengthMode::Fixed, Align::Left, 6, '0')?);
    // 4: amount, 12 BCD digits, right aligned
    table.insert(4, FieldSpec::new(FieldAttr::Bcd, LengthMode::Fixed, Align::Right, 12, '0')?);
    // 11: system trace audit number
    table.insert(11, FieldSpec::new(FieldAttr::Bcd, LengthMode::Fixed, Align::Left, 6, '0')?);
    // 41: terminal ID, 8 ASCII chars
    table.insert(41, FieldSpec::new(FieldAttr::Ascii, LengthMode::Fixed, Align::Left, 8, '0')?);

    Ok(table)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let table = sample_field_table()?;

    let mut multiplexer = TcpMultiplexer::new();
    let mut events = multiplexer.events();

    multiplexer.listen(args.port).await;

    if let ListenState::Error(reason) = multiplexer.current_state() {
        tracing::error!(port = args.port, reason, "could not start listener");
        return Err(reason.into());
    }

    tracing::info!(addr = ?multiplexer.local_addr(), decode = args.decode, "listener running");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,

            event = events.recv() => {
                let Ok(inbound) = event else { continue };

                if args.decode {
                    match decode_message(inbound.content.trim(), &table) {
                        Ok(message) => {
                            for field in message.fields {
                                match field.value {
                                    Ok(value) => tracing::info!(
                                        peer = %inbound.peer,
                                        field = field.number,
                                        value,
                                        "decoded field"
                                    ),
                                    Err(err) => tracing::warn!(
                                        peer = %inbound.peer,
                                        field = field.number,
                                        %err,
                                        "field decode failed"
                                    ),
                                }
                            }
                        },
                        Err(err) => {
                            tracing::warn!(peer = %inbound.peer, %err, "message decode failed");
                        },
                    }
                } else {
                    tracing::info!(peer = %inbound.peer, content = inbound.content, "received");
                }
            },
        }
    }

    multiplexer.stop_listening().await;
    tracing::info!("shut down");

    Ok(())
}
