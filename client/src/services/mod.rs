pub mod traffic_poller;
