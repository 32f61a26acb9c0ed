//! Store error mapping shared by the domain services.
//!
//! Connection failures become `service_unavailable`; query failures become
//! `internal_error`, whose message the HTTP adapter redacts.

use crate::domain::Error;
use crate::domain::ports::{
    FollowRepositoryError, SleepRecordRepositoryError, UserPersistenceError,
};

pub(super) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

pub(super) fn map_follow_error(error: FollowRepositoryError) -> Error {
    match error {
        FollowRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("follow repository unavailable: {message}"))
        }
        FollowRepositoryError::Query { message } => {
            Error::internal(format!("follow repository error: {message}"))
        }
    }
}

pub(super) fn map_record_error(error: SleepRecordRepositoryError) -> Error {
    match error {
        SleepRecordRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("sleep record repository unavailable: {message}"))
        }
        SleepRecordRepositoryError::Query { message } => {
            Error::internal(format!("sleep record repository error: {message}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;

    #[rstest]
    #[case(map_user_error(UserPersistenceError::connection("refused")), ErrorCode::ServiceUnavailable)]
    #[case(map_user_error(UserPersistenceError::query("bad column")), ErrorCode::InternalError)]
    #[case(map_follow_error(FollowRepositoryError::connection("refused")), ErrorCode::ServiceUnavailable)]
    #[case(map_follow_error(FollowRepositoryError::query("bad column")), ErrorCode::InternalError)]
    #[case(map_record_error(SleepRecordRepositoryError::connection("refused")), ErrorCode::ServiceUnavailable)]
    #[case(map_record_error(SleepRecordRepositoryError::query("bad column")), ErrorCode::InternalError)]
    fn connection_failures_are_unavailable_and_query_failures_internal(
        #[case] error: Error,
        #[case] expected: ErrorCode,
    ) {
        assert_eq!(error.code(), expected);
    }
}
