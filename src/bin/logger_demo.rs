use apparatus::hash::hash_json;
use apparatus::jsonrpc::{Method, make_request};
use apparatus::logger::get_logger;

fn main() -> anyhow::Result<()> {
    let plain = get_logger("someName", false, false);
    plain.info("some info");
    plain.debug("debug output is suppressed here");
    plain.warn("but warnings always show");

    let verbose = get_logger("verbose", true, false);
    verbose.debug("debug output is visible here");

    let timed = get_logger("timed", false, true);
    timed.info("lines from this handle carry a timestamp");

    let request = make_request(Method::Ping, None, None);
    timed.info(&format!("request {} hashes to {}", request, hash_json(&request)?));

    Ok(())
}
