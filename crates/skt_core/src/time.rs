use std::time::Instant;

/// Fixed-timestep accumulator. Simulation only advances in `fixed_dt`
/// slices; time can come from the wall clock (`begin_frame`) or be fed
/// directly (`feed`) for as-fast-as-possible headless runs.
pub struct TickDriver {
    pub fixed_dt: f64,
    pub max_accumulator: f64,
    accumulator: f64,
    pub total_time: f64,
    pub tick_count: u64,
    pub steps_this_frame: u32,
    pub real_dt: f64,
    last_instant: Instant,
    pub interpolation_alpha: f64,
}

impl TickDriver {
    pub fn new(fixed_dt: f64) -> Self {
        Self {
            fixed_dt,
            max_accumulator: 0.25,
            accumulator: 0.0,
            total_time: 0.0,
            tick_count: 0,
            steps_this_frame: 0,
            real_dt: 0.0,
            last_instant: Instant::now(),
            interpolation_alpha: 0.0,
        }
    }

    /// Feed wall-clock time since the previous call into the accumulator.
    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let real_dt = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.feed(real_dt);
    }

    /// Feed an explicit amount of time into the accumulator.
    pub fn feed(&mut self, seconds: f64) {
        self.real_dt = seconds;

        // Spiral-of-death cap
        if self.real_dt > self.max_accumulator {
            log::warn!(
                "Frame took {:.1}ms — capping accumulator to {}ms",
                self.real_dt * 1000.0,
                self.max_accumulator * 1000.0
            );
            self.real_dt = self.max_accumulator;
        }

        self.accumulator += self.real_dt;
        self.steps_this_frame = 0;
    }

    pub fn should_step(&mut self) -> bool {
        if self.accumulator >= self.fixed_dt {
            self.accumulator -= self.fixed_dt;
            self.total_time += self.fixed_dt;
            self.tick_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }

    pub fn end_frame(&mut self) {
        self.interpolation_alpha = self.accumulator / self.fixed_dt;
    }
}

impl Default for TickDriver {
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}
