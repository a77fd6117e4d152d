// Path: crates/cli/tests/verify_e2e.rs
//! End-to-end exercise of the `verify` subcommand against minimal mock
//! source-ledger and consensus HTTP backends, following the teacher's
//! convention of driving CLI subcommands through a live local server rather
//! than a trait-level mock.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread;

use certen_cli::commands::verify::{run, VerifyArgs};
use certen_cli::util::ExitCode;

/// A fixed JSON response keyed by request path (ignoring query string).
struct Route {
    path: &'static str,
    body: String,
}

/// Spawns a single-threaded mock HTTP server on an ephemeral port, serving
/// `routes` by exact path match and 404 otherwise. Returns the bound port.
fn spawn_mock_server(routes: Vec<Route>) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
    let port = listener.local_addr().unwrap().port();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let mut stream = match stream {
                Ok(s) => s,
                Err(_) => continue,
            };
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
            let mut request_line = String::new();
            if reader.read_line(&mut request_line).is_err() || request_line.is_empty() {
                continue;
            }
            // Drain headers.
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).is_err() || line == "\r\n" || line.is_empty() {
                    break;
                }
            }

            let path = request_line
                .split_whitespace()
                .nth(1)
                .unwrap_or("/")
                .split('?')
                .next()
                .unwrap_or("/")
                .to_string();

            let body = routes
                .iter()
                .find(|r| r.path == path)
                .map(|r| r.body.clone());

            let response = match body {
                Some(b) => format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    b.len(),
                    b
                ),
                None => "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string(),
            };
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.flush();
        }
    });

    port
}

fn write_validator_toml(dir: &std::path::Path, source_port: u16, consensus_port: u16) -> std::path::PathBuf {
    let toml = format!(
        r#"
[endpoints]
source_endpoint = "http://127.0.0.1:{source_port}"
target_endpoint = "http://127.0.0.1:1"
consensus_endpoint = "http://127.0.0.1:{consensus_port}"
target_chain_id = 1
contract_address = "0x0000000000000000000000000000000000000001"
ed25519_key_ref = "hex:{seed}"
bls_seed_ref = "hex:{seed}"

[discovery]
min_start_height = 0
"#,
        source_port = source_port,
        consensus_port = consensus_port,
        seed = "11".repeat(32),
    );
    let path = dir.join("validator.toml");
    std::fs::write(&path, toml).expect("write validator.toml");
    path
}

#[tokio::test]
async fn verify_reports_consensus_verified_when_all_layers_bind() {
    let leaf_hex = "22".repeat(32);
    let receipt_json = format!(
        r#"{{"start":"{leaf}","anchor":"{leaf}","entries":[],"local_block":7}}"#,
        leaf = leaf_hex
    );
    let intent_json = format!(
        r#"{{"intent_id":null,"transaction_hash":"{zero}","account_url":"acc://a.acme","partition":"bvn1","organization_adi":"acc://a.acme","intent_data":[1],"cross_chain_data":[],"governance_data":[],"replay_data":[]}}"#,
        zero = "00".repeat(32)
    );
    let account_body = format!(r#"{{"intent":{intent},"receipt":{receipt}}}"#, intent = intent_json, receipt = receipt_json);
    let chain_entry_body = format!(r#"{{"entry":"{leaf}","receipt":{receipt}}}"#, leaf = leaf_hex, receipt = receipt_json);
    let commit_body = r#"{"height":8,"signed_power":3,"total_power":3,"root_binding_ok":true}"#.to_string();
    let app_hash_body = format!(r#"{{"app_hash":"{leaf}"}}"#, leaf = leaf_hex);

    let source_port = spawn_mock_server(vec![
        Route { path: "/v1/source/account", body: account_body },
        Route { path: "/v1/source/chain-entry", body: chain_entry_body },
    ]);
    let consensus_port = spawn_mock_server(vec![
        Route { path: "/v1/consensus/commit", body: commit_body },
        Route { path: "/v1/consensus/app-hash", body: app_hash_body },
    ]);

    let tmp = tempfile::tempdir().expect("tempdir");
    let config_path = write_validator_toml(tmp.path(), source_port, consensus_port);

    let args = VerifyArgs {
        account_url: "acc://a.acme".to_string(),
        tx_hash: "00".repeat(32),
        config: config_path,
        chain_name: "bvn1".to_string(),
    };

    let exit = run(args).await.expect("verify run should not error");
    assert_eq!(exit as i32, ExitCode::Success as i32);
}

#[tokio::test]
async fn verify_reports_failure_when_source_ledger_unreachable() {
    let tmp = tempfile::tempdir().expect("tempdir");
    // Port 1 on loopback is never a live HTTP server in this sandbox.
    let config_path = write_validator_toml(tmp.path(), 1, 1);

    let args = VerifyArgs {
        account_url: "acc://a.acme".to_string(),
        tx_hash: "00".repeat(32),
        config: config_path,
        chain_name: "bvn1".to_string(),
    };

    let exit = run(args).await.expect("verify run should not error even on unreachable backend");
    assert_eq!(exit as i32, ExitCode::Runtime as i32);
}
