pub mod map_pipeline;
