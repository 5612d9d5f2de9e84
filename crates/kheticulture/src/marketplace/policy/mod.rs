mod cooldown;
mod wage;

pub use cooldown::CooldownPolicy;
pub use wage::{validate_wage_change, wage_bounds, WageDecision};
