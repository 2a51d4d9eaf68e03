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
use clap::{App, Arg};

use keybus::*;

#[async_std::main]
async fn main() {
    // Initiate logging
    env_logger::init();

    let (config, pattern, key_expr, capacity, count) = parse_args();

    println!("Opening session...");
    let session = open(config).unwrap();

    println!(
        "Declaring Ring Subscriber on '{}' with capacity {}...",
        pattern, capacity
    );
    let subscriber = session
        .declare_ring_subscriber(keyexpr::new(&pattern).unwrap(), capacity)
        .unwrap();

    for idx in 0..count {
        let buf = format!("[{:4}] Put from keybus!", idx);
        println!("Putting Data ('{}': '{}')...", key_expr, buf);
        session
            .put(keyexpr::new(&key_expr).unwrap(), buf.into())
            .await
            .unwrap();
    }

    println!("Pulling the {} most recent samples...", capacity);
    while let Some(sample) = subscriber.try_recv().unwrap() {
        println!(
            ">> [Subscriber] Pulled ('{}': '{}')",
            sample.key_expr, sample.value
        );
    }

    subscriber.undeclare().unwrap();
    session.close().unwrap();
}

fn parse_args() -> (Config, String, String, usize, u32) {
    let args = App::new("keybus ring subscriber example")
        .arg(
            Arg::from_usage("-s, --pattern=[KEYEXPR]  'The key expression to subscribe to.'")
                .default_value("demo/example/**"),
        )
        .arg(
            Arg::from_usage("-k, --key=[KEYEXPR]      'The key expression to publish on.'")
                .default_value("demo/example/kb-ring"),
        )
        .arg(
            Arg::from_usage("-r, --ring=[CAPACITY]    'The ring capacity.'").default_value("3"),
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
    let capacity: usize = args.value_of("ring").unwrap().parse().unwrap();
    let count: u32 = args.value_of("count").unwrap().parse().unwrap();

    (config, pattern, key_expr, capacity, count)
}
