use std::sync::Arc;

use crate::api::pool::WorkerPool;
use crate::config::AppConfig;
use crate::generator::{CommandEngine, ExporterPropertyMapper, GeneratorContext, ReportEngine};
use crate::printer::{CupsLookup, Printer};

/// Process wide state shared by every request.
pub struct AppState {
    pub config: AppConfig,
    pub context: GeneratorContext,
    pub pool: WorkerPool,
}

impl AppState {
    /// Wire the command engine and the CUPS printer from `config`.
    pub fn new_with_config(config: AppConfig) -> Self {
        let engine = Arc::new(CommandEngine::new(
            config.engine_command.clone(),
            config.engine_args.clone(),
            config.sign_command.clone(),
        ));
        let printer = config
            .printer
            .clone()
            .map(|printer| Arc::new(Printer::new(printer, Arc::new(CupsLookup))));

        Self::new(config, engine, printer)
    }

    pub fn new(
        config: AppConfig,
        engine: Arc<dyn ReportEngine>,
        printer: Option<Arc<Printer>>,
    ) -> Self {
        let context = GeneratorContext {
            tmp_dir: config.tmp_dir.clone(),
            engine,
            printer,
            mapper: ExporterPropertyMapper::new(),
        };
        let pool = WorkerPool::new(config.workers, config.queue);

        Self {
            config,
            context,
            pool,
        }
    }

    pub fn printer(&self) -> Option<&Arc<Printer>> {
        self.context.printer.as_ref()
    }
}
