mod account_status_tests;
