mod utils;

mod controller_tests;
