mod subtitle_pipeline_test;
mod video_service_test;
