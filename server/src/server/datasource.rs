use std::sync::RwLock;

use lazy_static::lazy_static;
use r2d2::{Pool, PooledConnection};
use r2d2_oracle::OracleConnectionManager;

use super::SimpleResult;

pub type Datasource = Pool<OracleConnectionManager>;
pub type Connection = PooledConnection<OracleConnectionManager>;

lazy_static! {
    static ref DATASOURCE: RwLock<Option<Datasource>> = RwLock::new(None);
}

fn new_datasource(config: &super::config::DbConnection) -> SimpleResult<Datasource> {
    let credentials = &config.credentials;
    let manager =
        OracleConnectionManager::new(&credentials.user, &credentials.pw, &config.url);
    let pool = r2d2::Pool::builder()
        .max_size(15)
        .build(manager)
        .map_err(|err| format!("Build db {:?} connection pool err: {:?}", &config.url, err))?;

    Ok(pool)
}

pub fn create_datasource(config: &super::config::DbConnection) -> SimpleResult<()> {
    let mut ds = DATASOURCE
        .write()
        .map_err(|_err| "Can not get lock for datasource creation".to_string())?;

    if ds.is_none() {
        *ds = Some(new_datasource(config)?);
    }

    Ok(())
}

pub fn get_connection() -> SimpleResult<Connection> {
    let ds = DATASOURCE
        .read()
        .map_err(|_err| "Can not get lock for datasource access".to_string())?;

    match ds.as_ref() {
        Some(pool) => pool.get().map_err(|err| format!("Connect to db err: {:?}", err)),
        None => Err("Datasource is not initialized".to_string()),
    }
}
