//! Simulated sensor publisher
//!
//! Publishes the home position, global position, compass heading and local pose of a vehicle
//! flying in a straight line at constant speed. Useful to exercise `nav_exec` without the
//! middleware bridge.

use std::time::{Duration, Instant};

use comms_if::{
    eqpt::{encode_frame, nav::{GeodeticPosition, NavSensData, SENS_TOPIC}},
    net::{MonitoredSocket, SocketOptions},
};
use structopt::StructOpt;

/// Approximate length of one degree of latitude.
const METERS_PER_DEG_LAT: f64 = 111_320.0;

#[derive(Debug, StructOpt)]
#[structopt(name = "sim_nav_pub", about = "Publish simulated navigation sensor data")]
struct Opt {
    /// Endpoint to bind the publisher to
    #[structopt(long, default_value = "tcp://*:5010")]
    endpoint: String,

    /// Home latitude in degrees
    #[structopt(long, default_value = "38.5885251", allow_hyphen_values = true)]
    home_lat: f64,

    /// Home longitude in degrees
    #[structopt(long, default_value = "-121.7055038", allow_hyphen_values = true)]
    home_lon: f64,

    /// Compass heading in degrees, North zero, clockwise positive
    #[structopt(long, default_value = "90.0", allow_hyphen_values = true)]
    heading_deg: f64,

    /// Ground speed in meters/second
    #[structopt(long, default_value = "2.0")]
    speed_ms: f64,

    /// Lateral offset of the start position, to the left of the direction of travel, in meters
    #[structopt(long, default_value = "0.0", allow_hyphen_values = true)]
    lateral_m: f64,

    /// Publishing rate in Hz
    #[structopt(long, default_value = "30.0")]
    rate_hz: f64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opt = Opt::from_args();

    if !(opt.rate_hz.is_finite() && opt.rate_hz > 0.0) {
        return Err(format!("Invalid rate: {}", opt.rate_hz).into());
    }

    // Create zmq context
    let ctx = zmq::Context::new();

    let socket_options = SocketOptions {
        bind: true,
        block_on_first_connect: false,
        ..Default::default()
    };

    let socket = MonitoredSocket::new(&ctx, zmq::PUB, socket_options, &opt.endpoint)?;

    println!("Sensor publisher open on {}", opt.endpoint);

    let home = GeodeticPosition::new(opt.home_lat, opt.home_lon, 0.0);

    // Local frame yaw, East zero and counter-clockwise positive
    let yaw_rad = std::f64::consts::FRAC_PI_2 - opt.heading_deg.to_radians();
    let orientation_q = [0.0, 0.0, (yaw_rad / 2.0).sin(), (yaw_rad / 2.0).cos()];

    let start = Instant::now();
    let period = Duration::try_from_secs_f64(1.0 / opt.rate_hz)?;

    loop {
        let t = start.elapsed().as_secs_f64();
        let dist_m = opt.speed_ms * t;
        let x_m = dist_m * yaw_rad.cos() - opt.lateral_m * yaw_rad.sin();
        let y_m = dist_m * yaw_rad.sin() + opt.lateral_m * yaw_rad.cos();

        let global = GeodeticPosition::new(
            home.lat_deg + y_m / METERS_PER_DEG_LAT,
            home.lon_deg + x_m / (METERS_PER_DEG_LAT * home.lat_deg.to_radians().cos()),
            0.0,
        );

        // Home is repeated so that late subscribers still receive it
        let msgs = [
            NavSensData::Home(home),
            NavSensData::GlobalPosition(global),
            NavSensData::Compass { heading_deg: opt.heading_deg },
            NavSensData::LocalPose {
                position_m: [x_m, y_m, 10.0],
                orientation_q,
            },
        ];

        for msg in msgs.iter() {
            let frame = encode_frame(SENS_TOPIC, msg)?;

            if let Err(e) = socket.send(&frame, 0) {
                println!("Failed to send sensor data: {}", e);
            }
        }

        std::thread::sleep(period);
    }
}
