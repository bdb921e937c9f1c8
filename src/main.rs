use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use log::{error, info};

use library::{db, rest_config, Config};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let cfg = Config::from_env().map_err(|e| {
        error!("invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    // set up database connection pool, migrating the schema if needed
    let pool = db::build_pool(&cfg.database_url, &cfg.pool).map_err(|e| {
        error!("failed to open sensor store {:?}: {}", cfg.database_url, e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    match pool.get().map(|mut conn| db::actions::count_readings(&mut conn)) {
        Ok(Ok(n)) => info!("sensor store holds {} readings", n),
        Ok(Err(e)) => error!("could not count stored readings: {}", e),
        Err(e) => error!("could not check out a connection: {}", e),
    }

    info!("starting sensor API server on {}", cfg.bind_address);
    let pool = web::Data::new(pool);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![actix_web::http::header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            // enable logger
            .wrap(middleware::Logger::default())
            .wrap(cors)
            // db pool
            .app_data(pool.clone())
            .configure(rest_config)
    })
    .bind(&cfg.bind_address)?
    .run()
    .await
}
