//! SQLite database for HMS bookings.

hms_core::define_database!(BookingDatabase, "Booking database migrations complete");
