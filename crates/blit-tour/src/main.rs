use anyhow::Result;
use blit_engine::device::GpuInit;
use blit_engine::logging::{init_logging, LoggingConfig};
use blit_engine::render::TextureFilter;
use blit_engine::window::{Runtime, RuntimeConfig};
use winit::dpi::LogicalSize;

use blit_tour::scenario::{self, Scenario};
use blit_tour::tour::Tour;

const ASSET_DIR: &str = "assets";

fn main() {
    init_logging(LoggingConfig::default());

    let name = std::env::args()
        .nth(1)
        .unwrap_or_else(|| scenario::DEFAULT_SCENARIO.to_string());

    let Some(scenario) = scenario::find(&name) else {
        log::error!(
            "unknown scenario {name:?}; available: {}",
            scenario::names().join(", ")
        );
        return;
    };

    // Failures are logged; the exit code stays 0.
    if let Err(e) = run(scenario) {
        log::error!("{e:#}");
    }
}

fn run(scenario: Scenario) -> Result<()> {
    log::info!("running scenario {}", scenario.name);

    let config = RuntimeConfig {
        title: scenario.title.to_string(),
        initial_size: LogicalSize::new(scenario.width as f64, scenario.height as f64),
        filter: TextureFilter::Linear,
    };

    let gpu_init = GpuInit {
        vsync: scenario.vsync,
        ..GpuInit::default()
    };

    Runtime::run(config, gpu_init, Tour::new(scenario, ASSET_DIR))
}
