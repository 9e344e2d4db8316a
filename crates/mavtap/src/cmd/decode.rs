use crate::cmd::DecodeArgs;
use crate::exit::{decode_error, CliError, CliResult, INTERNAL, SUCCESS, USAGE};
use crate::output::{print_event, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = parse_hex(&args.frame)?;
    let record = mavtap_messages::decode(&bytes).map_err(|err| decode_error("decode failed", err))?;
    let event = record
        .to_json()
        .map_err(|err| CliError::new(INTERNAL, format!("serialize failed: {err}")))?;

    print_event(&event, format);
    Ok(SUCCESS)
}

fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let digits = compact
        .strip_prefix("0x")
        .or_else(|| compact.strip_prefix("0X"))
        .unwrap_or(compact.as_str());

    hex::decode(digits).map_err(|err| CliError::new(USAGE, format!("invalid hex frame: {err}")))
}
