/*
 * netintel - network instant answers
 * Copyright (C) 2025 Akaere Networks
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */

use anyhow::Result;
use clap::Parser;

use netintel::config::Cli;
use netintel::core::logger::init_from_args;
use netintel::{DispatchOutcome, Dispatcher, QueryContext, log_debug, log_error, log_notice};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize logging
    if let Err(e) = init_from_args(args.debug, args.journald) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let query = args.query_string();
    let dispatcher = match Dispatcher::with_default_handlers() {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            log_error!("Failed to set up handlers: {:#}", e);
            return Err(e);
        }
    };
    log_debug!("Handlers: {:?}", dispatcher.handler_names());

    // Ctrl-C aborts in-flight lookups instead of killing the process mid-write
    let ctx = QueryContext::new();
    let canceller = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log_notice!("Interrupted, cancelling lookup");
            canceller.cancel();
        }
    });

    match dispatcher.dispatch(&ctx, &query).await {
        DispatchOutcome::Answered(answer) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&answer)?);
            } else {
                print!("{}", answer);
            }
        }
        DispatchOutcome::Absent => {
            println!("No answer for \"{}\".", query);
        }
        DispatchOutcome::Unhandled => {
            println!("Unrecognized query: \"{}\"", query);
            println!("Try \"dns: example.com/mx\", \"whois: example.com\" or \"AS15169\".");
            std::process::exit(2);
        }
    }

    Ok(())
}
