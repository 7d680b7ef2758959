pub mod connection;
pub mod memory;
pub mod postgres;

pub use connection::create_pool;
pub use memory::MemoryUserRepository;
pub use postgres::PgUserRepository;
