use actix_web::web;

pub mod handlers;
use handlers::sensors;

/// Path the first generation of sensor firmware posts to.
pub const LEGACY_INGEST_PATH: &str = "/dataToDB.php";

pub fn rest_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api").service(
            web::scope("/sensor-data")
                .service(
                    web::resource("")
                        .route(web::get().to(sensors::get_readings))
                        .route(web::post().to(sensors::post_reading)),
                )
                .service(web::resource("/latest").route(web::get().to(sensors::get_latest))),
        ),
    )
    .service(web::resource(LEGACY_INGEST_PATH).route(web::post().to(sensors::post_reading)));
}
