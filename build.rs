fn main() {
    // Forwards ESP-IDF build environment (link args, component includes)
    // when cross-compiling; a no-op for host builds.
    embuild::espidf::sysenv::output();
}
