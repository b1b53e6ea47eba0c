use serde::{Deserialize, Serialize};

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Colour {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Component-wise scale, used for per-face shading.
    pub fn scale(self, factor: f32) -> Self {
        let f = |c: u8| (c as f32 * factor).round().clamp(0.0, 255.0) as u8;
        Self::new(f(self.r), f(self.g), f(self.b))
    }
}

/// Environment settings that can change while a map is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnvVariable {
    SunlightColour,
    ShadowlightColour,
    SkyColour,
    FogColour,
    CloudsColour,
}

impl EnvVariable {
    /// Whether baked chunk geometry depends on this variable.
    pub fn affects_lighting(self) -> bool {
        matches!(self, Self::SunlightColour | Self::ShadowlightColour)
    }
}

/// Current environment colours of a map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapEnv {
    pub sunlight: Colour,
    pub shadowlight: Colour,
    pub sky: Colour,
    pub fog: Colour,
    pub clouds: Colour,
}

impl Default for MapEnv {
    fn default() -> Self {
        Self {
            sunlight: Colour::WHITE,
            shadowlight: Colour::new(155, 155, 155),
            sky: Colour::new(153, 204, 255),
            fog: Colour::WHITE,
            clouds: Colour::WHITE,
        }
    }
}

impl MapEnv {
    pub fn get(&self, variable: EnvVariable) -> Colour {
        match variable {
            EnvVariable::SunlightColour => self.sunlight,
            EnvVariable::ShadowlightColour => self.shadowlight,
            EnvVariable::SkyColour => self.sky,
            EnvVariable::FogColour => self.fog,
            EnvVariable::CloudsColour => self.clouds,
        }
    }

    pub fn set(&mut self, variable: EnvVariable, colour: Colour) {
        let slot = match variable {
            EnvVariable::SunlightColour => &mut self.sunlight,
            EnvVariable::ShadowlightColour => &mut self.shadowlight,
            EnvVariable::SkyColour => &mut self.sky,
            EnvVariable::FogColour => &mut self.fog,
            EnvVariable::CloudsColour => &mut self.clouds,
        };
        *slot = colour;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_light_colours_affect_lighting() {
        assert!(EnvVariable::SunlightColour.affects_lighting());
        assert!(EnvVariable::ShadowlightColour.affects_lighting());
        assert!(!EnvVariable::SkyColour.affects_lighting());
        assert!(!EnvVariable::FogColour.affects_lighting());
    }

    #[test]
    fn set_and_get_round_trip_per_variable() {
        let mut env = MapEnv::default();
        env.set(EnvVariable::FogColour, Colour::new(1, 2, 3));
        assert_eq!(env.get(EnvVariable::FogColour), Colour::new(1, 2, 3));
        assert_eq!(env.get(EnvVariable::SkyColour), MapEnv::default().sky);
    }

    #[test]
    fn scale_clamps() {
        assert_eq!(Colour::new(200, 100, 0).scale(0.5), Colour::new(100, 50, 0));
        assert_eq!(Colour::new(200, 200, 200).scale(2.0), Colour::WHITE);
    }
}
