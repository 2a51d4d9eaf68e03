//
// Copyright (c) 2023 ZettaScale Technology
//
// This program and the accompanying materials are made available under the
// terms of the Eclipse Public License 2.0 which is available at
// http://www.eclipse.org/legal/epl-2.0, or the Apache License, Version 2.0
// which is available at https://www.apache.org/licenses/LICENSE-2.0.
//
// SPDX-License-Identifier: EPL-2.0 OR Apache-2.0
//
// Contributors:
//   ZettaScale Zenoh Team, <zenoh@zettascale.tech>
//
use std::time::Duration;

use async_std::task::sleep;
use clap::{App, Arg};

use keybus::*;

#[async_std::main]
async fn main() {
    // Initiate logging
    env_logger::init();

    let (config, pattern, key_expr, value, count) = parse_args();

    println!("Opening session...");
    let session = open(config).unwrap();

    println!("Declaring Subscriber on '{}'...", pattern);
    let subscriber = session
        .declare_callback_subscriber(keyexpr::new(&pattern).unwrap(), |sample| {
            println!(
                ">> [Subscriber] Received {} ('{}': '{}')",
                sample.kind, sample.key_expr, sample.value
            );
        })
        .unwrap();

    println!("Putting Data on '{}'...", key_expr);
    for idx in 0..count {
        sleep(Duration::from_secs(1)).await;
        let buf = format!("[{:4}] {}", idx, value);
        println!("Putting Data ('{}': '{}')...", key_expr, buf);
        session
            .put(keyexpr::new(&key_expr).unwrap(), buf.into())
            .await
            .unwrap();
    }

    subscriber.undeclare().unwrap();
    session.close().unwrap();
}

fn parse_args() -> (Config, String, String, String, u32) {
    let args = App::new("keybus pub/sub example")
        .arg(
            Arg::from_usage("-s, --pattern=[KEYEXPR]  'The key expression to subscribe to.'")
                .default_value("demo/example/**"),
        )
        .arg(
            Arg::from_usage("-k, --key=[KEYEXPR]      'The key expression to publish on.'")
                .default_value("demo/example/kb-pubsub"),
        )
        .arg(
            Arg::from_usage("-v, --value=[VALUE]      'The value to publish.'")
                .default_value("Put from keybus!"),
        )
        .arg(
            Arg::from_usage("-n, --count=[COUNT]      'The number of puts to perform.'")
                .default_value("10"),
        )
        .arg(Arg::from_usage(
            "-c, --config=[FILE]      'A configuration file.'",
        ))
        .get_matches();

    let config = if let Some(conf_file) = args.value_of("config") {
        Config::from_file(conf_file).unwrap()
    } else {
        Config::default()
    };

    let pattern = args.value_of("pattern").unwrap().to_string();
    let key_expr = args.value_of("key").unwrap().to_string();
    let value = args.value_of("value").unwrap().to_string();
    let count: u32 = args.value_of("count").unwrap().parse().unwrap();

    (config, pattern, key_expr, value, count)
}
