use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use scte35_codec::{decode_base64, decode_hex, serde, xml, CueError, SpliceInfoSection};
use std::io::Read;
use std::process;

#[derive(Debug, Clone, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
    Xml,
}

#[derive(Parser)]
#[command(name = "scte35")]
#[command(about = "Decode and encode SCTE-35 splice_info_section payloads")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a base64 or 0x-prefixed hex payload
    Decode {
        /// The encoded splice_info_section
        #[arg(value_name = "PAYLOAD")]
        payload: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        out: OutputFormat,
    },
    /// Encode an XML or JSON document back to base64 and hex
    Encode {
        /// The document; reads stdin when omitted
        #[arg(value_name = "DOCUMENT")]
        document: Option<String>,
    },
}

fn main() {
    env_logger::try_init().ok();
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Decode { payload, out } => run_decode(&payload, out),
        Command::Encode { document } => run_encode(document),
    };
    if let Err(err) = result {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

fn run_decode(payload: &str, out: OutputFormat) -> Result<()> {
    let decoded = if payload.starts_with("0x") || payload.starts_with("0X") {
        decode_hex(payload)
    } else {
        decode_base64(payload)
    };

    // A failed CRC still yields the full structure; print it and report the
    // fault on stderr without failing the invocation.
    let section = match decoded {
        Ok(section) => section,
        Err(err) if err.kind() == CueError::Crc32Invalid => {
            eprintln!("Warning: {err}");
            err.into_section()
                .context("CRC fault carried no decoded section")?
        }
        Err(err) => bail!("decoding failed: {err}"),
    };

    match out {
        OutputFormat::Text => print!("{}", section.table("", "\t")),
        OutputFormat::Json => println!("{}", serde::to_json(&section)?),
        OutputFormat::Xml => println!("{}", xml::to_xml(&section)?),
    }
    Ok(())
}

fn run_encode(document: Option<String>) -> Result<()> {
    let document = match document {
        Some(document) => document,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("reading document from stdin")?;
            buffer
        }
    };

    let trimmed = document.trim();
    let section: SpliceInfoSection = if trimmed.starts_with('<') {
        xml::from_xml(trimmed).context("parsing XML document")?
    } else {
        serde::from_json(trimmed).context("parsing JSON document")?
    };

    println!("Base64: {}", section.base64());
    println!("Hex: {}", section.hex());
    Ok(())
}
