pub mod booking_routes;
