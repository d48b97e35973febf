mod observability;
mod persistence;
mod storage;
mod stt;
