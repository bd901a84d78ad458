/// Seeded mulberry32 generator. Every random choice the engine makes goes
/// through here so a match is reproducible from its seed.
#[derive(Clone, Debug)]
pub struct Rng {
    seed: u32,
}

impl Rng {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    pub fn next_f32(&mut self) -> f32 {
        self.seed = self.seed.wrapping_add(0x6d2b79f5);
        let mut t = self.seed;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        unit_from(t ^ (t >> 14))
    }

    /// Uniform integer in `[min, max]`, both ends inclusive.
    pub fn int(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = (max - min + 1) as f32;
        (min + (self.next_f32() * span).floor() as i32).min(max)
    }

    /// Uniform float in `[min, max)`.
    pub fn range_f32(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        let value = (min as f64 + self.next_f32() as f64 * (max as f64 - min as f64)) as f32;
        if value < max {
            value
        } else {
            max.next_down().max(min)
        }
    }
}

/// Maps a raw 32-bit draw into `[0, 1)`. Casting to f32 can round the top
/// draws up to 1.0, so those are pulled back to the largest value below it.
fn unit_from(out: u32) -> f32 {
    let value = (out as f64 / 4_294_967_296.0) as f32;
    if value < 1.0 {
        value
    } else {
        1.0f32.next_down()
    }
}
