use rand::Rng;

/// Draws Poisson distributed arrival counts from a shared random source.
pub struct CountGenerator<R: Rng> {
    rng: R,
}

impl<R: Rng> CountGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Knuth's multiplicative method: multiply uniform draws until the
    /// product falls below e^-rate. Takes rate + 1 draws on average, so it is
    /// only used for per-bucket rates (see `MAX_BUCKET_RATE`).
    ///
    /// Negative or non-finite rates are treated as zero.
    pub fn sample(&mut self, rate: f64) -> u32 {
        if !rate.is_finite() || rate <= 0.0 {
            return 0;
        }

        let limit = (-rate).exp();
        let mut product: f64 = 1.0;
        let mut draws: u32 = 0;

        loop {
            draws += 1;
            product *= self.rng.random::<f64>();
            if product < limit {
                return draws - 1;
            }
        }
    }
}
