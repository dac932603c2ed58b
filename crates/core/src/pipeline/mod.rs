pub mod detection_log;
pub mod frame_sampler;
pub mod job;
pub mod job_error;
pub mod job_scheduler;
pub mod pipeline_factory;
pub mod pipeline_logger;
pub mod pipeline_orchestrator;
pub mod run_result;
