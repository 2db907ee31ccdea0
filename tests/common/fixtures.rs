use serde_json::{json, Value};

use gesture_core::{LandmarkSet, Point};

pub const WIDTH: u32 = 640;
pub const HEIGHT: u32 = 480;

/// Eye half-height giving EAR 0.30 (eye width is 40, EAR = h / 20).
pub const EYE_OPEN: i32 = 6;
/// EAR 0.25, at the click boundary side that counts as open.
pub const EYE_HALF: i32 = 5;
/// EAR 0.10
pub const EYE_CLOSED: i32 = 2;
/// Inner-lip gap giving MAR 0.5 (inner width is 60, MAR = gap / 40).
pub const MOUTH_OPEN: i32 = 20;
pub const MOUTH_CLOSED: i32 = 0;

pub const NOSE_HOME: Point = Point::new(320, 260);

/// A face as it appears on the mirrored (display) image.
#[derive(Debug, Clone, Copy)]
pub struct Face {
    pub left_eye: i32,
    pub right_eye: i32,
    pub mouth: i32,
    pub nose: Point,
}

impl Default for Face {
    fn default() -> Self {
        Self {
            left_eye: EYE_OPEN,
            right_eye: EYE_OPEN,
            mouth: MOUTH_CLOSED,
            nose: NOSE_HOME,
        }
    }
}

impl Face {
    pub fn mouth_open(self) -> Self {
        Self {
            mouth: MOUTH_OPEN,
            ..self
        }
    }

    pub fn eyes(self, left: i32, right: i32) -> Self {
        Self {
            left_eye: left,
            right_eye: right,
            ..self
        }
    }

    pub fn nose_at(self, dx: i32, dy: i32) -> Self {
        Self {
            nose: Point::new(NOSE_HOME.x + dx, NOSE_HOME.y + dy),
            ..self
        }
    }

    /// Landmarks in display coordinates.
    pub fn display(&self) -> LandmarkSet {
        let mut pts = vec![Point::new(320, 330); 68];

        // 鼻部 27-35，30 为鼻尖
        for p in &mut pts[27..36] {
            *p = Point::new(320, 240);
        }
        pts[30] = self.nose;

        put_eye(&mut pts[42..48], 360, 200, self.left_eye);
        put_eye(&mut pts[36..42], 240, 200, self.right_eye);
        put_inner_lips(&mut pts[60..68], 290, 320, self.mouth);

        LandmarkSet::try_from(pts).expect("68 points")
    }

    /// Landmarks as the detector reports them on the raw camera image.
    pub fn raw(&self) -> LandmarkSet {
        self.display().mirrored(WIDTH)
    }

    pub fn json(&self) -> Value {
        landmarks_json(&self.raw())
    }
}

fn put_eye(eye: &mut [Point], x0: i32, y: i32, h: i32) {
    eye[0] = Point::new(x0, y);
    eye[1] = Point::new(x0 + 13, y - h);
    eye[2] = Point::new(x0 + 26, y - h);
    eye[3] = Point::new(x0 + 40, y);
    eye[4] = Point::new(x0 + 26, y + h);
    eye[5] = Point::new(x0 + 13, y + h);
}

fn put_inner_lips(lips: &mut [Point], x0: i32, y: i32, gap: i32) {
    lips[0] = Point::new(x0, y);
    lips[1] = Point::new(x0 + 15, y);
    lips[2] = Point::new(x0 + 30, y);
    lips[3] = Point::new(x0 + 45, y);
    lips[4] = Point::new(x0 + 60, y);
    lips[5] = Point::new(x0 + 45, y + gap);
    lips[6] = Point::new(x0 + 30, y + gap);
    lips[7] = Point::new(x0 + 15, y + gap);
}

pub fn landmarks_json(set: &LandmarkSet) -> Value {
    Value::Array(set.points().iter().map(|p| json!([p.x, p.y])).collect())
}

pub fn frame_payload(faces: &[Face]) -> Value {
    json!({
        "width": WIDTH,
        "height": HEIGHT,
        "faces": faces.iter().map(Face::json).collect::<Vec<_>>(),
        "returnImage": false,
    })
}
