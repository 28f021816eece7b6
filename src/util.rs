use num::NumCast;

// Stolen from [nannou](https://docs.rs/nannou/0.15.0/src/nannou/math.rs.html#42)
pub fn map_range<X, Y>(val: X, in_min: X, in_max: X, out_min: Y, out_max: Y) -> Option<Y>
where
    X: NumCast,
    Y: NumCast,
{
    let val_f: f64 = NumCast::from(val)?;
    let in_min_f: f64 = NumCast::from(in_min)?;
    let in_max_f: f64 = NumCast::from(in_max)?;
    let out_min_f: f64 = NumCast::from(out_min)?;
    let out_max_f: f64 = NumCast::from(out_max)?;

    NumCast::from((val_f - in_min_f) / (in_max_f - in_min_f) * (out_max_f - out_min_f) + out_min_f)
}

/// SplitMix64 finalizer.
pub fn mix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Combine a simulation seed, a stable agent identifier, the frame counter and the
/// elapsed-time accumulator into one seed. Neighbouring agents and frames land far
/// apart.
pub fn agent_frame_seed(seed: u64, agent_index: usize, frame: u64, elapsed: f64) -> u64 {
    let mut h = mix64(seed);
    h = mix64(h ^ agent_index as u64);
    h = mix64(h ^ frame);
    mix64(h ^ elapsed.to_bits())
}
