mod job_store_factory;
mod memory_job_store;
mod pg_job_store;
mod pg_pool;

pub use job_store_factory::JobStoreFactory;
pub use memory_job_store::MemoryJobStore;
pub use pg_job_store::PgJobStore;
pub use pg_pool::create_pool;
