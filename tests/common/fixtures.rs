use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{DynamicImage, ImageFormat, RgbImage};
use serde_json::{json, Value};

const LANDMARK_COUNT: usize = 33;
const VISIBILITY: f64 = 0.9;
const LIMB: f64 = 0.15;

const LEFT_SHOULDER: usize = 11;
const RIGHT_SHOULDER: usize = 12;
const LEFT_ELBOW: usize = 13;
const RIGHT_ELBOW: usize = 14;
const LEFT_WRIST: usize = 15;
const RIGHT_WRIST: usize = 16;
const LEFT_HIP: usize = 23;
const RIGHT_HIP: usize = 24;
const LEFT_KNEE: usize = 25;
const RIGHT_KNEE: usize = 26;
const LEFT_ANKLE: usize = 27;
const RIGHT_ANKLE: usize = 28;

/// Point `LIMB` away from `vertex` so the angle proximal-vertex-distal is `degrees`,
/// with the proximal joint straight above the vertex.
fn bend(vertex: (f64, f64), degrees: f64, mirror: f64) -> (f64, f64) {
    let theta = degrees.to_radians();
    (
        vertex.0 + LIMB * mirror * theta.sin(),
        vertex.1 - LIMB * theta.cos(),
    )
}

/// A full 33-point pose with both knees at `leg_deg` and both elbows at `arm_deg`.
pub fn pose_landmarks(leg_deg: f64, arm_deg: f64) -> Vec<Value> {
    let mut points = vec![(0.5, 0.2); LANDMARK_COUNT];

    for (mirror, x, shoulder, elbow, wrist, hip, knee, ankle) in [
        (-1.0, 0.42, LEFT_SHOULDER, LEFT_ELBOW, LEFT_WRIST, LEFT_HIP, LEFT_KNEE, LEFT_ANKLE),
        (1.0, 0.58, RIGHT_SHOULDER, RIGHT_ELBOW, RIGHT_WRIST, RIGHT_HIP, RIGHT_KNEE, RIGHT_ANKLE),
    ] {
        points[shoulder] = (x, 0.30);
        points[elbow] = (x, 0.45);
        points[wrist] = bend(points[elbow], arm_deg, mirror);
        points[hip] = (x, 0.55);
        points[knee] = (x, 0.72);
        points[ankle] = bend(points[knee], leg_deg, mirror);
    }

    points
        .into_iter()
        .map(|(x, y)| json!({"x": x, "y": y, "z": 0.0, "visibility": VISIBILITY}))
        .collect()
}

pub fn legs_at(leg_deg: f64) -> Vec<Value> {
    pose_landmarks(leg_deg, 170.0)
}

pub fn arms_at(arm_deg: f64) -> Vec<Value> {
    pose_landmarks(170.0, arm_deg)
}

/// A small solid PNG frame as plain base64.
pub fn png_base64() -> String {
    let frame = RgbImage::from_pixel(4, 4, image::Rgb([120, 90, 60]));
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(frame)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode png");
    STANDARD.encode(buf)
}

pub fn png_data_url() -> String {
    format!("data:image/png;base64,{}", png_base64())
}

/// Builds the library-side set for a fixture frame, for replaying frames locally.
pub fn landmark_set(frame: Vec<Value>) -> pose_backend::pose::LandmarkSet {
    let landmarks = serde_json::from_value(Value::Array(frame)).expect("fixture landmarks");
    pose_backend::pose::LandmarkSet::new(landmarks).expect("valid fixture frame")
}
