/// Speed settings for one round, in timer steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Pacing {
    pub(crate) start_steps: u32,
    pub(crate) min_steps: u32,
    pub(crate) ramp_every: u32,
}

/// Turns fixed timer steps into game ticks.
///
/// A tick fires every `steps_per_tick` steps. After every `ramp_every` ticks
/// the interval shrinks by one step until it reaches `min_steps`.
#[derive(Debug)]
pub(crate) struct Scheduler {
    pacing: Pacing,
    steps_per_tick: u32,
    since_tick: u32,
    ticks: u64,
}

impl Scheduler {
    pub(crate) fn new(pacing: Pacing) -> Self {
        Self {
            pacing,
            steps_per_tick: pacing.start_steps.max(1),
            since_tick: 0,
            ticks: 0,
        }
    }

    pub(crate) fn steps_per_tick(&self) -> u32 {
        self.steps_per_tick
    }

    /// Advance one timer step. Returns true when a game tick is due.
    pub(crate) fn on_step(&mut self) -> bool {
        self.since_tick += 1;
        if self.since_tick < self.steps_per_tick {
            return false;
        }
        self.since_tick = 0;
        self.ticks += 1;

        let ramp = u64::from(self.pacing.ramp_every.max(1));
        if self.ticks % ramp == 0 && self.steps_per_tick > self.pacing.min_steps.max(1) {
            self.steps_per_tick -= 1;
            log::debug!("pace: {} steps per tick", self.steps_per_tick);
        }
        true
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::new(self.pacing);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pacing(start_steps: u32, min_steps: u32, ramp_every: u32) -> Pacing {
        Pacing {
            start_steps,
            min_steps,
            ramp_every,
        }
    }

    /// Steps at which ticks fired, counting from 1.
    fn fire_steps(scheduler: &mut Scheduler, steps: u32) -> Vec<u32> {
        (1..=steps).filter(|_| scheduler.on_step()).collect()
    }

    #[test]
    fn fires_every_n_steps() {
        let mut scheduler = Scheduler::new(pacing(5, 5, 100));
        assert_eq!(fire_steps(&mut scheduler, 20), vec![5, 10, 15, 20]);
    }

    #[test]
    fn ramps_down_to_the_floor() {
        let mut scheduler = Scheduler::new(pacing(4, 2, 2));
        // 4, 4 → 3, 3 → 2, 2, ...
        assert_eq!(
            fire_steps(&mut scheduler, 20),
            vec![4, 8, 11, 14, 16, 18, 20]
        );
        assert_eq!(scheduler.steps_per_tick(), 2);
    }

    #[test]
    fn single_step_pace_fires_every_step() {
        let mut scheduler = Scheduler::new(pacing(1, 1, 1));
        assert_eq!(fire_steps(&mut scheduler, 3), vec![1, 2, 3]);
    }

    #[test]
    fn reset_restores_start_pace() {
        let mut scheduler = Scheduler::new(pacing(3, 1, 1));
        fire_steps(&mut scheduler, 10);
        assert!(scheduler.steps_per_tick() < 3);
        scheduler.reset();
        assert_eq!(scheduler.steps_per_tick(), 3);
        assert_eq!(fire_steps(&mut scheduler, 3), vec![3]);
    }
}
