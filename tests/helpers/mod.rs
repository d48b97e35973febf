#![allow(dead_code)]

pub mod mock_stt_server;
pub mod test_postgres;
