//! Synthetic GRIB2 wind files for decoder and fetcher tests.
//!
//! Messages use lat/lon template 3.0, product template 4.0 and simple
//! packing with 16 bits, binary scale 0 and decimal scale 0. Values must
//! therefore be whole numbers within 65535 of the field minimum.

#![allow(dead_code)]

/// Parameter numbers in discipline 0, category 2.
pub const UGRD: u8 = 2;
pub const VGRD: u8 = 3;
pub const TMP_CATEGORY: u8 = 0;

/// Builds one GRIB2 message for a global grid.
pub struct WindMessageBuilder {
    ni: u32,
    nj: u32,
    param_category: u8,
    param_number: u8,
    data_values: Vec<f32>,
}

impl WindMessageBuilder {
    pub fn new(param_number: u8, ni: u32, nj: u32) -> Self {
        Self {
            ni,
            nj,
            param_category: 2,
            param_number,
            data_values: vec![0.0; (ni * nj) as usize],
        }
    }

    pub fn with_category(mut self, category: u8) -> Self {
        self.param_category = category;
        self
    }

    pub fn with_data(mut self, data: Vec<f32>) -> Self {
        assert_eq!(data.len(), (self.ni * self.nj) as usize);
        self.data_values = data;
        self
    }

    pub fn with_constant_value(mut self, value: f32) -> Self {
        self.data_values = vec![value; (self.ni * self.nj) as usize];
        self
    }

    /// Build the complete GRIB2 message bytes.
    pub fn build(&self) -> Vec<u8> {
        let section1 = self.build_section1();
        let section3 = self.build_section3();
        let section4 = self.build_section4();
        let section5 = self.build_section5();
        let section6 = self.build_section6();
        let section7 = self.build_section7();

        let message_length = 16
            + section1.len()
            + section3.len()
            + section4.len()
            + section5.len()
            + section6.len()
            + section7.len()
            + 4;

        let mut message = Vec::with_capacity(message_length);
        message.extend_from_slice(b"GRIB");
        message.extend_from_slice(&[0, 0]);
        message.push(0); // Discipline: meteorological
        message.push(2); // Edition
        message.extend_from_slice(&(message_length as u64).to_be_bytes());

        message.extend_from_slice(&section1);
        message.extend_from_slice(&section3);
        message.extend_from_slice(&section4);
        message.extend_from_slice(&section5);
        message.extend_from_slice(&section6);
        message.extend_from_slice(&section7);
        message.extend_from_slice(b"7777");

        message
    }

    fn build_section1(&self) -> Vec<u8> {
        let mut section = Vec::new();
        section.extend_from_slice(&21u32.to_be_bytes());
        section.push(1);
        section.extend_from_slice(&7u16.to_be_bytes()); // NCEP
        section.extend_from_slice(&0u16.to_be_bytes()); // Sub-center
        section.push(2); // Master table version
        section.push(1); // Local table version
        section.push(1); // Start of forecast
        section.extend_from_slice(&2024u16.to_be_bytes());
        section.push(6);
        section.push(1);
        section.push(6);
        section.push(0);
        section.push(0);
        section.push(0); // Operational
        section.push(1); // Forecast
        section
    }

    fn build_section3(&self) -> Vec<u8> {
        let mut section = Vec::new();
        section.extend_from_slice(&72u32.to_be_bytes());
        section.push(3);
        section.push(0);
        section.extend_from_slice(&(self.ni * self.nj).to_be_bytes());
        section.push(0);
        section.push(0);
        section.extend_from_slice(&0u16.to_be_bytes()); // Template 3.0

        section.push(6); // Spherical earth
        section.push(0);
        section.extend_from_slice(&0u32.to_be_bytes());
        section.push(0);
        section.extend_from_slice(&0u32.to_be_bytes());
        section.push(0);
        section.extend_from_slice(&0u32.to_be_bytes());

        let di = 360_000_000 / self.ni;
        let dj = 180_000_000 / (self.nj.max(2) - 1);
        section.extend_from_slice(&self.ni.to_be_bytes());
        section.extend_from_slice(&self.nj.to_be_bytes());
        section.extend_from_slice(&0u32.to_be_bytes()); // Basic angle
        section.extend_from_slice(&0xFFFF_FFFFu32.to_be_bytes()); // Subdivisions
        section.extend_from_slice(&grib_i32(90_000_000)); // La1
        section.extend_from_slice(&grib_i32(0)); // Lo1
        section.push(48);
        section.extend_from_slice(&grib_i32(-90_000_000)); // La2
        section.extend_from_slice(&grib_i32((360_000_000 - di) as i32)); // Lo2
        section.extend_from_slice(&di.to_be_bytes());
        section.extend_from_slice(&dj.to_be_bytes());
        section.push(0); // +i, -j, i consecutive
        section
    }

    fn build_section4(&self) -> Vec<u8> {
        let mut section = Vec::new();
        section.extend_from_slice(&34u32.to_be_bytes());
        section.push(4);
        section.extend_from_slice(&0u16.to_be_bytes());
        section.extend_from_slice(&0u16.to_be_bytes()); // Template 4.0
        section.push(self.param_category);
        section.push(self.param_number);
        section.push(2);
        section.push(0);
        section.push(0);
        section.extend_from_slice(&0u16.to_be_bytes());
        section.push(0);
        section.push(1); // Hours
        section.extend_from_slice(&0u32.to_be_bytes());
        section.push(103); // Height above ground
        section.push(0);
        section.extend_from_slice(&10u32.to_be_bytes()); // 10 m
        section.push(255);
        section.push(0);
        section.extend_from_slice(&0u32.to_be_bytes());
        section
    }

    fn build_section5(&self) -> Vec<u8> {
        let (reference, range) = self.packing_range();
        let bits_per_value: u8 = if range == 0.0 { 0 } else { 16 };

        let mut section = Vec::new();
        section.extend_from_slice(&21u32.to_be_bytes());
        section.push(5);
        section.extend_from_slice(&(self.ni * self.nj).to_be_bytes());
        section.extend_from_slice(&0u16.to_be_bytes()); // Template 5.0
        section.extend_from_slice(&reference.to_be_bytes());
        section.extend_from_slice(&0u16.to_be_bytes()); // Binary scale factor
        section.extend_from_slice(&0u16.to_be_bytes()); // Decimal scale factor
        section.push(bits_per_value);
        section.push(0);
        section
    }

    fn build_section6(&self) -> Vec<u8> {
        let mut section = Vec::new();
        section.extend_from_slice(&6u32.to_be_bytes());
        section.push(6);
        section.push(255); // No bitmap
        section
    }

    fn build_section7(&self) -> Vec<u8> {
        let (reference, range) = self.packing_range();
        let mut packed = Vec::new();
        if range != 0.0 {
            for &value in &self.data_values {
                let delta = (value - reference).round() as u16;
                packed.extend_from_slice(&delta.to_be_bytes());
            }
        }

        let mut section = Vec::new();
        section.extend_from_slice(&(5 + packed.len() as u32).to_be_bytes());
        section.push(7);
        section.extend_from_slice(&packed);
        section
    }

    fn packing_range(&self) -> (f32, f32) {
        let (min, max) = self
            .data_values
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), &v| {
                (min.min(v), max.max(v))
            });
        (min, max - min)
    }
}

/// GRIB2 signed integers are sign-magnitude.
fn grib_i32(value: i32) -> [u8; 4] {
    let magnitude = value.unsigned_abs() & 0x7FFF_FFFF;
    let raw = if value < 0 {
        magnitude | 0x8000_0000
    } else {
        magnitude
    };
    raw.to_be_bytes()
}

/// A two-message file: UGRD followed by VGRD.
pub fn wind_file(ni: u32, nj: u32, u: Vec<f32>, v: Vec<f32>) -> Vec<u8> {
    let mut bytes = WindMessageBuilder::new(UGRD, ni, nj).with_data(u).build();
    bytes.extend(WindMessageBuilder::new(VGRD, ni, nj).with_data(v).build());
    bytes
}

/// A two-message file with constant components.
pub fn constant_wind_file(ni: u32, nj: u32, u: f32, v: f32) -> Vec<u8> {
    let mut bytes = WindMessageBuilder::new(UGRD, ni, nj)
        .with_constant_value(u)
        .build();
    bytes.extend(
        WindMessageBuilder::new(VGRD, ni, nj)
            .with_constant_value(v)
            .build(),
    );
    bytes
}
