use actix_web::dev::Server;
use actix_web::{error::JsonPayloadError, middleware::Logger, web, App, HttpRequest, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::configuration::JwtSettings;
use crate::error::{AppError, ValidationError};
use crate::middleware::{JwtMiddleware, LoggerMiddleware};
use crate::routes::{
    change_password, get_current_user, health_check, login, logout, refresh, register,
    update_account,
};
use crate::security::security_headers;
use crate::users::UserStore;

/// Route bad or incomplete JSON bodies through the common error envelope
fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::Validation(ValidationError::MalformedBody(err.to_string())).into()
}

pub fn run(
    listener: TcpListener,
    store: Arc<dyn UserStore>,
    jwt_config: JwtSettings,
) -> Result<Server, std::io::Error> {
    let store = web::Data::from(store);
    let jwt_config_data = web::Data::new(jwt_config.clone());

    let server = HttpServer::new(move || {
        let protected = || JwtMiddleware::new(jwt_config.clone());

        App::new()
            // Global middleware; LoggerMiddleware innermost so failures
            // are rendered inside the request-id scope
            .wrap(LoggerMiddleware)
            .wrap(Logger::default())
            .wrap(security_headers())

            // Shared state
            .app_data(store.clone())
            .app_data(jwt_config_data.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))

            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/api/v1/users")
                    // Public routes
                    .route("/register", web::post().to(register))
                    .route("/login", web::post().to(login))
                    .route("/refresh-token", web::post().to(refresh))
                    // Routes requiring a valid access token
                    .service(
                        web::resource("/logout")
                            .wrap(protected())
                            .route(web::post().to(logout)),
                    )
                    .service(
                        web::resource("/change-password")
                            .wrap(protected())
                            .route(web::post().to(change_password)),
                    )
                    .service(
                        web::resource("/current-user")
                            .wrap(protected())
                            .route(web::get().to(get_current_user)),
                    )
                    .service(
                        web::resource("/update-account")
                            .wrap(protected())
                            .route(web::patch().to(update_account)),
                    ),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
