#![cfg(test)]

mod loopback_test;
