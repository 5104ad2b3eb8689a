//! Identity wrappers and pull request locators for review intake.

use url::Url;

use super::error::ReviewError;

/// Public GitHub REST API base.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Repository owner wrapper to avoid stringly typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOwner(String);

impl RepositoryOwner {
    pub(crate) fn new(value: &str) -> Result<Self, ReviewError> {
        if value.is_empty() {
            return Err(ReviewError::MissingPathSegments);
        }
        Ok(Self(value.to_owned()))
    }

    /// Borrow the owner value.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Repository name wrapper to prevent parameter mix-ups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryName(String);

impl RepositoryName {
    pub(crate) fn new(value: &str) -> Result<Self, ReviewError> {
        if value.is_empty() {
            return Err(ReviewError::MissingPathSegments);
        }
        Ok(Self(value.to_owned()))
    }

    /// Borrow the repository name.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Pull request number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PullRequestNumber(u64);

impl PullRequestNumber {
    /// Validates that the number is positive.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::InvalidPullRequestNumber`] for zero.
    pub const fn new(value: u64) -> Result<Self, ReviewError> {
        if value == 0 {
            return Err(ReviewError::InvalidPullRequestNumber);
        }
        Ok(Self(value))
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// GitHub App installation identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstallationId(u64);

impl InstallationId {
    /// Validates that the identifier is positive.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::InvalidInstallationId`] for zero.
    pub const fn new(value: u64) -> Result<Self, ReviewError> {
        if value == 0 {
            return Err(ReviewError::InvalidInstallationId);
        }
        Ok(Self(value))
    }

    /// Parses an identifier from text such as an environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::InvalidInstallationId`] when the text is not a
    /// positive integer.
    pub fn parse(value: &str) -> Result<Self, ReviewError> {
        value
            .trim()
            .parse::<u64>()
            .map_err(|_| ReviewError::InvalidInstallationId)
            .and_then(Self::new)
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Derives the GitHub API base URL from a web host.
fn derive_api_base_from_host(
    scheme: &str,
    host: &str,
    port: Option<u16>,
) -> Result<Url, ReviewError> {
    if host.eq_ignore_ascii_case("github.com") {
        return Url::parse(DEFAULT_API_BASE)
            .map_err(|error| ReviewError::InvalidUrl(error.to_string()));
    }

    let authority = if host.contains(':') {
        format!("[{host}]")
    } else {
        host.to_owned()
    };
    let mut api_url = Url::parse(&format!("{scheme}://{authority}"))
        .map_err(|error| ReviewError::InvalidUrl(error.to_string()))?;

    api_url
        .set_port(port)
        .map_err(|()| ReviewError::InvalidUrl("invalid port".to_owned()))?;
    api_url.set_path("api/v3");
    Ok(api_url)
}

/// Target pull request and the API base used to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestLocator {
    api_base: Url,
    owner: RepositoryOwner,
    repository: RepositoryName,
    number: PullRequestNumber,
}

impl PullRequestLocator {
    /// Parses a GitHub pull request URL in the form
    /// `https://github.com/<owner>/<repo>/pull/<number>`.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::InvalidUrl` when parsing fails, `MissingPathSegments`
    /// when the URL path is not `/owner/repo/pull/<number>`, and
    /// `InvalidPullRequestNumber` when the final segment is not a positive
    /// integer.
    pub fn parse(input: &str) -> Result<Self, ReviewError> {
        let parsed =
            Url::parse(input).map_err(|error| ReviewError::InvalidUrl(error.to_string()))?;

        let mut segments = parsed
            .path_segments()
            .ok_or(ReviewError::MissingPathSegments)?;

        let owner_segment = segments.next().ok_or(ReviewError::MissingPathSegments)?;
        let repository_segment = segments.next().ok_or(ReviewError::MissingPathSegments)?;
        let marker = segments.next().ok_or(ReviewError::MissingPathSegments)?;
        let number_segment = segments.next().ok_or(ReviewError::MissingPathSegments)?;

        if marker != "pull" || number_segment.is_empty() {
            return Err(ReviewError::MissingPathSegments);
        }

        let owner = RepositoryOwner::new(owner_segment)?;
        let repository = RepositoryName::new(repository_segment)?;
        let number = parse_pull_request_number(number_segment)?;

        let host = parsed
            .host_str()
            .ok_or_else(|| ReviewError::InvalidUrl("URL must include a host".to_owned()))?;
        let api_base = derive_api_base_from_host(parsed.scheme(), host, parsed.port())?;

        Ok(Self {
            api_base,
            owner,
            repository,
            number,
        })
    }

    /// Builds a locator from an `owner/repo` slug, as exported by GitHub
    /// Actions in `GITHUB_REPOSITORY`, and a pull request number.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::InvalidUrl` for an unparsable API base and
    /// `MissingPathSegments` when the slug is not `owner/repo`.
    pub fn from_repository(
        api_base: &str,
        repository_slug: &str,
        number: PullRequestNumber,
    ) -> Result<Self, ReviewError> {
        let api_base =
            Url::parse(api_base).map_err(|error| ReviewError::InvalidUrl(error.to_string()))?;
        let (owner_part, repository_part) = repository_slug
            .trim()
            .split_once('/')
            .ok_or(ReviewError::MissingPathSegments)?;
        if repository_part.contains('/') {
            return Err(ReviewError::MissingPathSegments);
        }

        Ok(Self {
            api_base,
            owner: RepositoryOwner::new(owner_part)?,
            repository: RepositoryName::new(repository_part)?,
            number,
        })
    }

    /// API base URL used for REST calls.
    #[must_use]
    pub const fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Repository owner.
    #[must_use]
    pub const fn owner(&self) -> &RepositoryOwner {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryName {
        &self.repository
    }

    /// Pull request number.
    #[must_use]
    pub const fn number(&self) -> PullRequestNumber {
        self.number
    }

    pub(crate) fn pull_request_path(&self) -> String {
        format!(
            "/repos/{}/{}/pulls/{}",
            self.owner.as_str(),
            self.repository.as_str(),
            self.number.get()
        )
    }

    pub(crate) fn files_path(&self) -> String {
        format!("{}/files", self.pull_request_path())
    }

    pub(crate) fn reviews_path(&self) -> String {
        format!("{}/reviews", self.pull_request_path())
    }

    /// Contents API path with each file path segment percent-encoded.
    pub(crate) fn contents_path(&self, file_path: &str) -> Result<String, ReviewError> {
        let mut url = Url::parse("http://localhost/")
            .map_err(|error| ReviewError::InvalidUrl(error.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| ReviewError::InvalidUrl("cannot build contents path".to_owned()))?
            .extend([
                "repos",
                self.owner.as_str(),
                self.repository.as_str(),
                "contents",
            ])
            .extend(file_path.split('/'));
        Ok(url.path().to_owned())
    }
}

/// Parses a pull request number from text.
///
/// # Errors
///
/// Returns [`ReviewError::InvalidPullRequestNumber`] when the text is not a
/// positive integer.
pub fn parse_pull_request_number(value: &str) -> Result<PullRequestNumber, ReviewError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| ReviewError::InvalidPullRequestNumber)
        .and_then(PullRequestNumber::new)
}
