//! Navigation output monitor
//!
//! Subscribes to the commands and affordances published by `nav_exec` and prints them. Also
//! serves flight mode requests, acknowledging each one, so that the safety port of `nav_exec` can
//! be exercised without an autopilot.

use comms_if::{
    eqpt::{
        afford::{AffordanceMsg, YawCmd, AFFORD_TOPIC, YAW_CMD_TOPIC},
        mode::{SetModeRequest, SetModeResponse},
        split_frame,
    },
    net::{MonitoredSocket, SocketOptions},
};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "nav_monitor", about = "Print nav_exec outputs and serve mode requests")]
struct Opt {
    /// Endpoint of the command publisher
    #[structopt(long, default_value = "tcp://localhost:5011")]
    cmd_endpoint: String,

    /// Endpoint to bind the flight mode service to
    #[structopt(long, default_value = "tcp://*:5012")]
    mode_endpoint: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opt = Opt::from_args();

    // Create context
    let ctx = zmq::Context::new();

    let cmd_socket = MonitoredSocket::new(
        &ctx,
        zmq::SUB,
        SocketOptions {
            block_on_first_connect: false,
            recv_timeout: 10,
            ..Default::default()
        },
        &opt.cmd_endpoint
    )?;
    cmd_socket.set_subscribe(YAW_CMD_TOPIC.as_bytes())?;
    cmd_socket.set_subscribe(AFFORD_TOPIC.as_bytes())?;

    let mode_socket = MonitoredSocket::new(
        &ctx,
        zmq::REP,
        SocketOptions {
            bind: true,
            block_on_first_connect: false,
            recv_timeout: 10,
            send_timeout: 10,
            ..Default::default()
        },
        &opt.mode_endpoint
    )?;

    println!(
        "Monitoring {} and serving flight modes on {}",
        opt.cmd_endpoint, opt.mode_endpoint
    );

    loop {
        match cmd_socket.recv_string(0) {
            Ok(Ok(frame)) => print_frame(&frame),
            Ok(Err(_)) => println!("Non UTF-8 message"),
            Err(zmq::Error::EAGAIN) => (),
            Err(e) => return Err(e.into()),
        }

        match mode_socket.recv_string(0) {
            Ok(Ok(req)) => {
                let response = match serde_json::from_str::<SetModeRequest>(&req) {
                    Ok(r) => {
                        println!("Mode request: {}", r.custom_mode);
                        SetModeResponse { mode_sent: true }
                    },
                    Err(e) => {
                        println!("Invalid mode request: {}", e);
                        SetModeResponse { mode_sent: false }
                    }
                };

                mode_socket.send(&serde_json::to_string(&response)?, 0)?;
            },
            Ok(Err(_)) => println!("Non UTF-8 mode request"),
            Err(zmq::Error::EAGAIN) => (),
            Err(e) => return Err(e.into()),
        }
    }
}

fn print_frame(frame: &str) {
    let (topic, payload) = match split_frame(frame) {
        Ok(s) => s,
        Err(e) => {
            println!("Invalid frame: {}", e);
            return
        }
    };

    match topic {
        YAW_CMD_TOPIC => match serde_json::from_str::<YawCmd>(payload) {
            Ok(c) => println!("[{}] yaw rate {:+.4} rad/s", c.timestamp, c.yaw_rate_rads),
            Err(e) => println!("Invalid yaw command: {}", e),
        },
        AFFORD_TOPIC => match serde_json::from_str::<AffordanceMsg>(payload) {
            Ok(a) => println!(
                "[{}] centre {:+.2} m, left {:.2} m, right {:.2} m, angle {:+.3} rad, {}",
                a.timestamp,
                a.dist_center_m,
                a.dist_left_m,
                a.dist_right_m,
                a.rel_angle_rad,
                if a.in_bound { "in bound" } else { "OUT OF BOUND" }
            ),
            Err(e) => println!("Invalid affordance: {}", e),
        },
        _ => println!("Unknown topic {}", topic),
    }
}
