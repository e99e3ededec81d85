use simplelog::{Color, ColorChoice, Config, ConfigBuilder, Level, LevelFilter, TermLogger, TerminalMode, TestLogger};

fn config() -> Config { 
    let mut cb = ConfigBuilder::new();
    cb.set_location_level(LevelFilter::Off);
    cb.set_target_level(LevelFilter::Off);
    cb.set_thread_level(LevelFilter::Off);
    cb.set_level_color(Level::Trace, Some(Color::Green));
    cb.build()
}

pub fn init_simple_logger(l: LevelFilter) -> Result<(), log::SetLoggerError> { 
    TermLogger::init(
        l,
        config(),
        TerminalMode::Mixed,
        ColorChoice::Auto
    )
}

// Output is captured by the test harness. Only the first call installs
// a logger, later calls are no-ops.
pub fn init_test_logger(l: LevelFilter) { 
    let _ = TestLogger::init(l, config());
}
