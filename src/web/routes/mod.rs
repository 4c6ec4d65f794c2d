pub mod category_routes;
pub mod match_routes;
pub mod user_routes;
