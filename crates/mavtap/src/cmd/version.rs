use mavtap_messages::MessageRegistry;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("mavtap {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    let registry = MessageRegistry::global();
    let messages: Vec<String> = registry
        .message_ids()
        .into_iter()
        .map(|id| format!("{id}={}", registry.type_name(id)))
        .collect();

    println!("name: mavtap");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("MAVTAP_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("protocol: mavlink-v1");
    println!("messages: {}", messages.join(", "));
    println!("subscriber_socket: {}", cfg!(unix));

    Ok(SUCCESS)
}
