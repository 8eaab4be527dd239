use anyhow::{Context, Result, anyhow};
use engine_ddf::RecordDescriptor;
use engine_script::{StringRef, decode_into, encode_to_vec};
use serde_json::{Map, Value};
use std::fmt::Write as _;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::PackArgs;
use crate::source::compile_schemas;

pub fn compile(schemas: &[std::path::PathBuf], output: Option<&Path>, describe: bool) -> Result<()> {
    let set = compile_schemas(schemas)?;
    if describe {
        println!("{}", serde_json::to_string_pretty(&engine_schema::describe(&set))?);
    }
    if let Some(output) = output {
        let bytes = set.to_bytes()?;
        std::fs::write(output, &bytes)
            .with_context(|| format!("writing bundle {}", output.display()))?;
        info!(file = %output.display(), bytes = bytes.len(), "bundle written");
    }
    Ok(())
}

pub fn encode(args: &PackArgs, base: u64) -> Result<()> {
    let (descriptor, record) = prepare(args)?;
    let (mut buffer, encoded) = encode_to_vec(&descriptor, &record, args.capacity)?;
    let size = encoded.size();

    println!("message   {}", descriptor.name);
    println!("id        {}", descriptor.message_id());
    println!("fixed     {} bytes", descriptor.fixed_size);
    println!("packed    {size} bytes");
    for string in encoded.strings() {
        if let StringRef::Pending(offset) = string.target {
            println!("string    slot {:#06x} -> {:#06x}", string.slot, offset);
        }
    }

    let resolved = encoded.relocate(&mut buffer, base)?;
    println!("base      {base:#x}");
    print!("{}", hex_dump(&resolved.bytes()[..size]));
    Ok(())
}

pub fn roundtrip(args: &PackArgs) -> Result<()> {
    let (descriptor, record) = prepare(args)?;
    let (mut buffer, encoded) = encode_to_vec(&descriptor, &record, args.capacity)?;
    let resolved = encoded.relocate_in_place(&mut buffer)?;
    let decoded: Map<String, Value> = decode_into(&descriptor, &resolved)?;
    println!("{}", serde_json::to_string_pretty(&Value::Object(decoded))?);
    Ok(())
}

fn prepare(args: &PackArgs) -> Result<(Arc<RecordDescriptor>, Value)> {
    let set = args.source.load()?;
    let descriptor = set
        .get(&args.message)
        .cloned()
        .ok_or_else(|| anyhow!("unknown message '{}', have: {}", args.message, set.names().join(", ")))?;
    let record = read_json(&args.input)?;
    Ok((descriptor, record))
}

fn read_json(path: &Path) -> Result<Value> {
    let text = if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).context("reading stdin")?;
        text
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
    };
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Offset, 16 hex bytes, printable ASCII.
fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::new();
    for (row, chunk) in bytes.chunks(16).enumerate() {
        let _ = write!(out, "{:08x} ", row * 16);
        for i in 0..16 {
            match chunk.get(i) {
                Some(b) => {
                    let _ = write!(out, " {b:02x}");
                }
                None => out.push_str("   "),
            }
        }
        out.push_str("  |");
        out.extend(chunk.iter().map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '.'
            }
        }));
        out.push_str("|\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_dump() {
        let dump = hex_dump(b"hi\0");
        assert_eq!(
            dump,
            format!("00000000  68 69 00{}  |hi.|\n", " ".repeat(13 * 3))
        );
    }

    #[test]
    fn test_hex_dump_rows() {
        let dump = hex_dump(&[0u8; 20]);
        let lines: Vec<_> = dump.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("00000010 "));
    }
}
