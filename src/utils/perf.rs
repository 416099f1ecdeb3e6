use std::time::Duration;

/// Times `$block` and reports it against a budget in microseconds.
/// Evaluates to the bare block while `DF.log_performance` is off.
#[macro_export]
macro_rules! trace_time {
    ($name:expr, $budget_micros:expr, $block:block) => {{
        if $crate::config::DF.log_performance {
            let started = $crate::utils::AppInstant::now();
            let out = $block;
            $crate::utils::report_elapsed($name, started.elapsed(), $budget_micros);
            out
        } else {
            $block
        }
    }};
}

/// Returns whether `elapsed` blew the budget.
#[doc(hidden)]
pub fn report_elapsed(name: &str, elapsed: Duration, budget_micros: u128) -> bool {
    let micros = elapsed.as_micros();
    let over = micros > budget_micros;
    if over {
        let build = if cfg!(debug_assertions) { "debug" } else { "release" };
        log::warn!(
            "Slow {} ({} build): {:.3}ms, budget {:.3}ms",
            name,
            build,
            micros as f64 / 1000.0,
            budget_micros as f64 / 1000.0
        );
    } else {
        log::trace!("{} took {}us", name, micros);
    }
    over
}
