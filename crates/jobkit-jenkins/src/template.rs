//! Renders the `config.xml` document for a freestyle job.
//!
//! Jenkins takes job definitions as XML, so this is a plain string
//! builder over a fixed document shape: git SCM section, LogRotator
//! retention block, and an optional parameter-definition property.

use jobkit_core::{
    BuildDiscarder,
    BuildParameter,
};

/// Everything that varies between rendered job configs.
pub(crate) struct JobConfig<'a> {
    pub git_repo: &'a str,
    pub git_branch: &'a str,
    pub discarder: BuildDiscarder,
    pub parameters: &'a [BuildParameter],
    pub credentials_id: Option<&'a str>,
}

pub(crate) fn render_job_config(config: &JobConfig<'_>) -> String {
    let mut xml = String::from("<?xml version='1.0' encoding='UTF-8'?>\n");
    xml.push_str("<project>\n");
    xml.push_str("  <actions/>\n");
    xml.push_str("  <description></description>\n");
    xml.push_str("  <keepDependencies>false</keepDependencies>\n");

    push_log_rotator(&mut xml, &config.discarder);
    push_properties(&mut xml, config.parameters);
    push_scm(&mut xml, config);

    xml.push_str("  <canRoam>true</canRoam>\n");
    xml.push_str("  <disabled>false</disabled>\n");
    xml.push_str("  <blockBuildWhenDownstreamBuilding>false</blockBuildWhenDownstreamBuilding>\n");
    xml.push_str("  <blockBuildWhenUpstreamBuilding>false</blockBuildWhenUpstreamBuilding>\n");
    xml.push_str("  <triggers/>\n");
    xml.push_str("  <concurrentBuild>false</concurrentBuild>\n");
    xml.push_str("  <builders/>\n");
    xml.push_str("  <publishers/>\n");
    xml.push_str("  <buildWrappers/>\n");
    xml.push_str("</project>\n");
    xml
}

fn push_log_rotator(xml: &mut String, discarder: &BuildDiscarder) {
    xml.push_str("  <logRotator class=\"hudson.tasks.LogRotator\">\n");
    xml.push_str(&format!(
        "    <daysToKeep>{}</daysToKeep>\n",
        discarder.store_builds_days()
    ));
    xml.push_str(&format!(
        "    <numToKeep>{}</numToKeep>\n",
        discarder.store_builds_total()
    ));
    xml.push_str(&format!(
        "    <artifactDaysToKeep>{}</artifactDaysToKeep>\n",
        discarder.store_artifacts_days()
    ));
    xml.push_str(&format!(
        "    <artifactNumToKeep>{}</artifactNumToKeep>\n",
        discarder.store_artifacts_total()
    ));
    xml.push_str("  </logRotator>\n");
}

fn push_properties(xml: &mut String, parameters: &[BuildParameter]) {
    if parameters.is_empty() {
        xml.push_str("  <properties/>\n");
        return;
    }

    xml.push_str("  <properties>\n");
    xml.push_str("    <hudson.model.ParametersDefinitionProperty>\n");
    xml.push_str("      <parameterDefinitions>\n");
    for parameter in parameters {
        xml.push_str("        <hudson.model.StringParameterDefinition>\n");
        xml.push_str(&format!(
            "          <name>{}</name>\n",
            xml_escape(parameter.name())
        ));
        xml.push_str(&format!(
            "          <description>{}</description>\n",
            xml_escape(parameter.description())
        ));
        xml.push_str(&format!(
            "          <defaultValue>{}</defaultValue>\n",
            xml_escape(parameter.default_value())
        ));
        xml.push_str("        </hudson.model.StringParameterDefinition>\n");
    }
    xml.push_str("      </parameterDefinitions>\n");
    xml.push_str("    </hudson.model.ParametersDefinitionProperty>\n");
    xml.push_str("  </properties>\n");
}

fn push_scm(xml: &mut String, config: &JobConfig<'_>) {
    xml.push_str("  <scm class=\"hudson.plugins.git.GitSCM\">\n");
    xml.push_str("    <configVersion>2</configVersion>\n");
    xml.push_str("    <userRemoteConfigs>\n");
    xml.push_str("      <hudson.plugins.git.UserRemoteConfig>\n");
    xml.push_str(&format!(
        "        <url>{}</url>\n",
        xml_escape(config.git_repo)
    ));
    if let Some(credentials_id) = config.credentials_id {
        xml.push_str(&format!(
            "        <credentialsId>{}</credentialsId>\n",
            xml_escape(credentials_id)
        ));
    }
    xml.push_str("      </hudson.plugins.git.UserRemoteConfig>\n");
    xml.push_str("    </userRemoteConfigs>\n");
    xml.push_str("    <branches>\n");
    xml.push_str("      <hudson.plugins.git.BranchSpec>\n");
    xml.push_str(&format!(
        "        <name>{}</name>\n",
        xml_escape(config.git_branch)
    ));
    xml.push_str("      </hudson.plugins.git.BranchSpec>\n");
    xml.push_str("    </branches>\n");
    xml.push_str("    <doGenerateSubmoduleConfigurations>false</doGenerateSubmoduleConfigurations>\n");
    xml.push_str("    <submoduleCfg class=\"list\"/>\n");
    xml.push_str("    <extensions/>\n");
    xml.push_str("  </scm>\n");
}

/// Escape XML special characters
fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config<'a>(parameters: &'a [BuildParameter]) -> JobConfig<'a> {
        JobConfig {
            git_repo: "git@github.com:example/helloworld.git",
            git_branch: "main",
            discarder: BuildDiscarder::default(),
            parameters,
            credentials_id: None,
        }
    }

    #[test]
    fn test_renders_git_section() {
        let xml = render_job_config(&base_config(&[]));
        assert!(xml.contains("<url>git@github.com:example/helloworld.git</url>"));
        assert!(xml.contains("<name>main</name>"));
        assert!(!xml.contains("<credentialsId>"));
    }

    #[test]
    fn test_renders_credentials_id_when_present() {
        let mut config = base_config(&[]);
        config.credentials_id = Some("app-gitRepoCredential");
        let xml = render_job_config(&config);
        assert!(xml.contains("<credentialsId>app-gitRepoCredential</credentialsId>"));
    }

    #[test]
    fn test_default_discarder_renders_unset_markers() {
        let xml = render_job_config(&base_config(&[]));
        assert!(xml.contains("<daysToKeep>-1</daysToKeep>"));
        assert!(xml.contains("<numToKeep>-1</numToKeep>"));
        assert!(xml.contains("<artifactDaysToKeep>-1</artifactDaysToKeep>"));
        assert!(xml.contains("<artifactNumToKeep>-1</artifactNumToKeep>"));
    }

    #[test]
    fn test_renders_retention_values() {
        let mut config = base_config(&[]);
        config.discarder = BuildDiscarder::new()
            .with_store_builds_days(7)
            .with_store_builds_total(20);
        let xml = render_job_config(&config);
        assert!(xml.contains("<daysToKeep>7</daysToKeep>"));
        assert!(xml.contains("<numToKeep>20</numToKeep>"));
    }

    #[test]
    fn test_parameters_property_omitted_when_empty() {
        let xml = render_job_config(&base_config(&[]));
        assert!(xml.contains("<properties/>"));
        assert!(!xml.contains("ParametersDefinitionProperty"));
    }

    #[test]
    fn test_renders_string_parameters() {
        let parameters = vec![
            BuildParameter::new("RELEASE")
                .with_description("Release build")
                .with_default_value("false"),
            BuildParameter::new("TARGET"),
        ];
        let xml = render_job_config(&base_config(&parameters));
        assert!(xml.contains("<hudson.model.ParametersDefinitionProperty>"));
        assert_eq!(xml.matches("<hudson.model.StringParameterDefinition>").count(), 2);
        assert!(xml.contains("<name>RELEASE</name>"));
        assert!(xml.contains("<description>Release build</description>"));
        assert!(xml.contains("<defaultValue>false</defaultValue>"));
    }

    #[test]
    fn test_escapes_user_supplied_strings() {
        let mut config = base_config(&[]);
        config.git_branch = "feature/<wip> & \"quotes\"";
        let xml = render_job_config(&config);
        assert!(xml.contains("<name>feature/&lt;wip&gt; &amp; &quot;quotes&quot;</name>"));
    }
}
