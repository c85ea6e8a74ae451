//! Request signing helper.
//!
//! Computes a valid (timestamp, signature) header pair for one of the
//! protected subscriber actions and prints a ready-to-run curl command.
//!
//! ```
//! API_SECRET=s3cr3t cargo run --example sign_request -- subscribe-add
//! ```

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

const ACTIONS: [&str; 3] = ["subscribe-add", "subscribe-update", "subscribe-delete"];

fn sign(secret: &str, action: &str, timestamp: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(timestamp.as_bytes());
    mac.update(action.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn main() {
    let action = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "subscribe-add".to_string());
    if !ACTIONS.contains(&action.as_str()) {
        eprintln!("unknown action {action:?}, expected one of {ACTIONS:?}");
        std::process::exit(1);
    }

    let secret = std::env::var("API_SECRET").unwrap_or_else(|_| "s3cr3t".to_string());
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_secs()
        .to_string();

    let signature = sign(&secret, &action, &timestamp);

    println!("Action:      {action}");
    println!("Message:     {timestamp}{action}");
    println!("X-Timestamp: {timestamp}");
    println!("X-Signature: {signature}");
    println!();

    match action.as_str() {
        "subscribe-add" => {
            println!("curl -X POST http://127.0.0.1:8080/api/v1/mail-list/subscribers \\");
            println!("     -H 'X-Timestamp: {timestamp}' \\");
            println!("     -H 'X-Signature: {signature}' \\");
            println!("     -H 'Content-Type: application/json' \\");
            println!("     -d '{{\"address\": \"user@example.com\"}}'");
        }
        "subscribe-update" => {
            println!(
                "curl -X PUT http://127.0.0.1:8080/api/v1/mail-list/subscribers/user@example.com \\"
            );
            println!("     -H 'X-Timestamp: {timestamp}' \\");
            println!("     -H 'X-Signature: {signature}' \\");
            println!("     -H 'Content-Type: application/json' \\");
            println!("     -d '{{\"name\": \"Test User\"}}'");
        }
        _ => {
            println!(
                "curl -X DELETE http://127.0.0.1:8080/api/v1/mail-list/subscribers/user@example.com \\"
            );
            println!("     -H 'X-Timestamp: {timestamp}' \\");
            println!("     -H 'X-Signature: {signature}'");
        }
    }
}
