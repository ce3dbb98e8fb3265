//! Diesel schema for the shop-floor tables.

diesel::table! {
    /// Cutting jobs.
    cutting_jobs (job_id) {
        /// Serial job key.
        job_id -> Int8,
        /// Lifecycle status.
        #[max_length = 32]
        status -> Varchar,
        /// Planned completion date.
        due_date -> Nullable<Date>,
        /// Free-form notes.
        notes -> Text,
        /// Submission timestamp.
        creation_date -> Timestamptz,
    }
}

diesel::table! {
    /// Article catalog.
    articles (article_id) {
        /// Serial article key.
        article_id -> Int8,
        /// Unique catalog number.
        #[max_length = 64]
        article_num -> Varchar,
        /// Display name.
        name -> Text,
        /// Sheet thickness in millimetres.
        thickness -> Float8,
        /// Material designation.
        #[max_length = 64]
        material_type -> Varchar,
        /// Drawing location.
        file_url -> Nullable<Text>,
    }
}

diesel::table! {
    /// Bill-of-materials rows.
    job_details (job_detail_id) {
        /// Serial detail key.
        job_detail_id -> Int8,
        /// Owning job.
        job_id -> Int8,
        /// Planned article.
        article_id -> Int8,
        /// Planned pieces.
        quantity_planned -> Int4,
        /// Pieces actually cut.
        quantity_actual -> Nullable<Int4>,
        /// Rejected pieces.
        rejection_count -> Nullable<Int4>,
    }
}

diesel::table! {
    /// Cutting programs, at most one per job.
    cutting_programs (program_id) {
        /// Serial program key.
        program_id -> Int8,
        /// Owning job.
        job_id -> Int8,
        /// Program file name.
        #[max_length = 255]
        file_name -> Varchar,
    }
}

diesel::table! {
    /// Operator cutting logs.
    cutting_log (log_entry_id) {
        /// Serial log key.
        log_entry_id -> Int8,
        /// Program the log belongs to.
        program_id -> Int8,
        /// Operator name.
        operator_name -> Text,
        /// Day of the cut.
        cut_date -> Nullable<Date>,
        /// Meter reading before cutting.
        start_meter -> Nullable<Float8>,
        /// Meter reading after cutting.
        end_meter -> Nullable<Float8>,
        /// Oxygen pressure in bar.
        oxygen_pressure -> Nullable<Float8>,
        /// Air flag stored as 0 or 1.
        air_pressure -> Int2,
        /// Preparation minutes.
        preparation_time_minutes -> Nullable<Int4>,
        /// Cutting minutes.
        cutting_time_minutes -> Nullable<Int4>,
        /// First save.
        start_time -> Nullable<Timestamptz>,
        /// Latest update.
        end_time -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(job_details -> articles (article_id));
diesel::joinable!(job_details -> cutting_jobs (job_id));
diesel::joinable!(cutting_programs -> cutting_jobs (job_id));
diesel::joinable!(cutting_log -> cutting_programs (program_id));

diesel::allow_tables_to_appear_in_same_query!(
    cutting_jobs,
    articles,
    job_details,
    cutting_programs,
    cutting_log,
);
