//! Coordinate conversion elements. Angles are in degrees at the port
//! boundary; trig internally uses radians.

use crate::port::{PortSet, PortType, PortValue};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversionKind {
    Rect2Polar,
    Polar2Rect,
    Rect2Complex,
    Complex2Rect,
    Polar2Complex,
    Complex2Polar,
}

pub struct Conversion {
    pub ports: PortSet,
    kind: ConversionKind,
}

impl Conversion {
    pub fn new(kind: ConversionKind) -> Self {
        let ports = match kind {
            ConversionKind::Rect2Polar => PortSet::new()
                .with_input("real", PortType::Analog)
                .with_input("imaginary", PortType::Analog)
                .with_output("magnitude", PortType::Analog)
                .with_output("angle", PortType::Analog),
            ConversionKind::Polar2Rect => PortSet::new()
                .with_input("magnitude", PortType::Analog)
                .with_input("angle", PortType::Analog)
                .with_output("real", PortType::Analog)
                .with_output("imaginary", PortType::Analog),
            ConversionKind::Rect2Complex => PortSet::new()
                .with_input("real", PortType::Analog)
                .with_input("imaginary", PortType::Analog)
                .with_output("output", PortType::Complex),
            ConversionKind::Complex2Rect => PortSet::new()
                .with_input("input", PortType::Complex)
                .with_output("real", PortType::Analog)
                .with_output("imaginary", PortType::Analog),
            ConversionKind::Polar2Complex => PortSet::new()
                .with_input("magnitude", PortType::Analog)
                .with_input("angle", PortType::Analog)
                .with_output("output", PortType::Complex),
            ConversionKind::Complex2Polar => PortSet::new()
                .with_input("input", PortType::Complex)
                .with_output("magnitude", PortType::Analog)
                .with_output("angle", PortType::Analog),
        };
        Self { ports, kind }
    }

    pub fn update(&mut self, inputs: &[PortValue]) {
        match self.kind {
            ConversionKind::Rect2Polar => {
                let (re, im) = (inputs[0].as_analog(), inputs[1].as_analog());
                let mag = (re * re + im * im).sqrt();
                let ang = im.atan2(re).to_degrees();
                self.ports.outputs[0].value = PortValue::Analog(mag);
                self.ports.outputs[1].value = PortValue::Analog(ang);
            }
            ConversionKind::Polar2Rect => {
                let (mag, ang) = (inputs[0].as_analog(), inputs[1].as_analog().to_radians());
                self.ports.outputs[0].value = PortValue::Analog(mag * ang.cos());
                self.ports.outputs[1].value = PortValue::Analog(mag * ang.sin());
            }
            ConversionKind::Rect2Complex => {
                let (re, im) = (inputs[0].as_analog(), inputs[1].as_analog());
                self.ports.outputs[0].value = PortValue::Complex(re, im);
            }
            ConversionKind::Complex2Rect => {
                let (re, im) = inputs[0].as_complex();
                self.ports.outputs[0].value = PortValue::Analog(re);
                self.ports.outputs[1].value = PortValue::Analog(im);
            }
            ConversionKind::Polar2Complex => {
                let (mag, ang) = (inputs[0].as_analog(), inputs[1].as_analog().to_radians());
                self.ports.outputs[0].value = PortValue::Complex(mag * ang.cos(), mag * ang.sin());
            }
            ConversionKind::Complex2Polar => {
                let (re, im) = inputs[0].as_complex();
                let mag = (re * re + im * im).sqrt();
                let ang = im.atan2(re).to_degrees();
                self.ports.outputs[0].value = PortValue::Analog(mag);
                self.ports.outputs[1].value = PortValue::Analog(ang);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_to_polar_matches_3_4_5_triangle() {
        let mut c = Conversion::new(ConversionKind::Rect2Polar);
        c.update(&[PortValue::Analog(3.0), PortValue::Analog(4.0)]);
        let mag = c.ports.outputs[0].value.as_analog();
        let ang = c.ports.outputs[1].value.as_analog();
        assert!((mag - 5.0).abs() < 1e-4);
        assert!((ang - 53.13).abs() < 0.1);
    }

    #[test]
    fn polar_round_trips_through_rect() {
        let mut to_polar = Conversion::new(ConversionKind::Rect2Polar);
        to_polar.update(&[PortValue::Analog(3.0), PortValue::Analog(4.0)]);
        let mag = to_polar.ports.outputs[0].value;
        let ang = to_polar.ports.outputs[1].value;

        let mut to_rect = Conversion::new(ConversionKind::Polar2Rect);
        to_rect.update(&[mag, ang]);
        let re = to_rect.ports.outputs[0].value.as_analog();
        let im = to_rect.ports.outputs[1].value.as_analog();
        assert!((re - 3.0).abs() < 1e-4);
        assert!((im - 4.0).abs() < 1e-4);
    }

    #[test]
    fn complex_polar_round_trip() {
        let mut to_polar = Conversion::new(ConversionKind::Complex2Polar);
        to_polar.update(&[PortValue::Complex(3.0, 4.0)]);
        let mag = to_polar.ports.outputs[0].value;
        let ang = to_polar.ports.outputs[1].value;

        let mut to_complex = Conversion::new(ConversionKind::Polar2Complex);
        to_complex.update(&[mag, ang]);
        let (re, im) = to_complex.ports.outputs[0].value.as_complex();
        assert!((re - 3.0).abs() < 1e-4);
        assert!((im - 4.0).abs() < 1e-4);
    }
}
