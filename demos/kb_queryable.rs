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
use futures::prelude::*;

use keybus::*;

#[async_std::main]
async fn main() {
    // Initiate logging
    env_logger::init();

    let (config, key_expr, selector, value) = parse_args();

    println!("Opening session...");
    let session = open(config).unwrap();

    println!("Declaring Queryable on '{}'...", key_expr);
    let mut queryable = session
        .declare_queryable(keyexpr::new(&key_expr).unwrap(), true)
        .unwrap();

    println!("Sending Query '{}'...", selector);
    let mut replies = session
        .get(
            selector.as_str(),
            QueryTarget::default(),
            ConsolidationMode::default(),
        )
        .await
        .unwrap();

    while let Ok(query) = queryable.receiver().try_recv() {
        println!(
            ">> [Queryable ] Received Query '{}' with parameters '{}'",
            query.key_expr, query.parameters
        );
        query
            .reply_async(Sample::new(query.key_expr.clone(), value.as_str()))
            .await;
    }

    while let Some(reply) = replies.next().await {
        match reply.result {
            Ok(sample) => println!(
                ">> [Requester ] Received Reply ('{}': '{}')",
                sample.key_expr, sample.value
            ),
            Err(err) => println!(">> [Requester ] Received Error ('{}')", err),
        }
    }

    queryable.undeclare().unwrap();
    session.close().unwrap();
}

fn parse_args() -> (Config, String, String, String) {
    let args = App::new("keybus queryable example")
        .arg(
            Arg::from_usage("-k, --key=[KEYEXPR]      'The key expression served by the queryable.'")
                .default_value("demo/example/**"),
        )
        .arg(
            Arg::from_usage("-s, --selector=[SELECTOR] 'The selection of keys to query.'")
                .default_value("demo/example/kb-queryable"),
        )
        .arg(
            Arg::from_usage("-v, --value=[VALUE]      'The value to reply with.'")
                .default_value("Reply from keybus!"),
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

    let key_expr = args.value_of("key").unwrap().to_string();
    let selector = args.value_of("selector").unwrap().to_string();
    let value = args.value_of("value").unwrap().to_string();

    (config, key_expr, selector, value)
}
