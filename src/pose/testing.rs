//! Synthetic frames with known joint angles.

use crate::pose::landmarks::{Joint, Landmark, LandmarkSet, JOINT_COUNT};

const LIMB: f64 = 0.15;

fn place(lms: &mut [Landmark], joint: Joint, x: f64, y: f64) {
    lms[joint.index()] = Landmark::new(x, y, 0.0, 0.9);
}

/// End of a limb segment leaving `(x, y)` at `degrees` from straight up.
fn bend(x: f64, y: f64, degrees: f64, mirror: f64) -> (f64, f64) {
    let r = degrees.to_radians();
    (x + mirror * LIMB * r.sin(), y - LIMB * r.cos())
}

/// Upright body with level shoulders and hips, knees at `leg` degrees and
/// elbows at `arm` degrees on both sides.
pub(crate) fn pose_at(leg: f64, arm: f64) -> LandmarkSet {
    let mut lms = vec![Landmark::new(0.5, 0.2, 0.0, 0.9); JOINT_COUNT];

    for (mirror, shoulder, elbow, wrist, hip, knee, ankle, x) in [
        (
            -1.0,
            Joint::LeftShoulder,
            Joint::LeftElbow,
            Joint::LeftWrist,
            Joint::LeftHip,
            Joint::LeftKnee,
            Joint::LeftAnkle,
            0.42,
        ),
        (
            1.0,
            Joint::RightShoulder,
            Joint::RightElbow,
            Joint::RightWrist,
            Joint::RightHip,
            Joint::RightKnee,
            Joint::RightAnkle,
            0.58,
        ),
    ] {
        place(&mut lms, shoulder, x, 0.30);
        place(&mut lms, elbow, x, 0.45);
        let (wx, wy) = bend(x, 0.45, arm, mirror);
        place(&mut lms, wrist, wx, wy);

        place(&mut lms, hip, x, 0.55);
        place(&mut lms, knee, x, 0.72);
        let (ax, ay) = bend(x, 0.72, leg, mirror);
        place(&mut lms, ankle, ax, ay);
    }

    LandmarkSet::new(lms).expect("synthetic pose is complete")
}

pub(crate) fn legs_at(degrees: f64) -> LandmarkSet {
    pose_at(degrees, 180.0)
}

pub(crate) fn arms_at(degrees: f64) -> LandmarkSet {
    pose_at(180.0, degrees)
}
